mod input;
mod link;
