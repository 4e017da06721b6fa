mod session;
mod upload;
