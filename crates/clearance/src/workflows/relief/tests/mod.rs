mod common;
mod history;
mod info;
