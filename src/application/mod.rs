pub mod app;
pub mod countdown;
pub mod screen;
pub mod selection;
pub mod state;

#[cfg(test)]
pub mod testing;
