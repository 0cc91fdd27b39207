pub mod components;
pub mod disclosure;
pub mod layout;
pub mod line_input;
pub mod theme;
