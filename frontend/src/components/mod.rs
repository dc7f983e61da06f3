pub mod board;
pub mod exp_bar;
pub mod login;
pub mod markdown;
pub mod player_list;
pub mod sheet_modal;
