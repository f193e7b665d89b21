mod screen;
mod view_controller;

pub use {
    screen::Screen,
    view_controller::{ViewController, status_text},
};
