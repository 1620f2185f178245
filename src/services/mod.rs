pub mod category;
pub mod comment;
pub mod compilation;
pub mod event;
pub mod request;
pub mod stats_client;
pub mod user;

pub use category::CategoryService;
pub use comment::CommentService;
pub use compilation::CompilationService;
pub use event::EventService;
pub use request::RequestService;
pub use user::UserService;
