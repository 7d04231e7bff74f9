mod helpers;
mod monitor;
mod session;
