/// UI building blocks for the labeler window

pub mod class_buttons;

pub use class_buttons::class_buttons;
