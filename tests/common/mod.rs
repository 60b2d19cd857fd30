#![allow(dead_code)]

pub mod app;
pub mod observer;
pub mod source;
