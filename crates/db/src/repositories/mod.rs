pub mod analyzed_comment_repo;
pub mod password_reset_repo;
pub mod user_repo;
pub mod video_analysis_repo;

pub use analyzed_comment_repo::AnalyzedCommentRepo;
pub use password_reset_repo::PasswordResetRepo;
pub use user_repo::UserRepo;
pub use video_analysis_repo::VideoAnalysisRepo;
