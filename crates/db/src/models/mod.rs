pub mod analyzed_comment;
pub mod password_reset;
pub mod user;
pub mod video_analysis;
