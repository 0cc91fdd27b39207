pub mod card_panel;
pub mod menu;
pub mod progress_bar;
pub mod select_list;
