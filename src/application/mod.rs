//! Application layer - Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.

pub mod handlers;

pub use handlers::community::{
    AddCommentHandler, CommunityAccess, CreatePostHandler, GetPostHandler, ListCommentsHandler,
    ListPostsHandler, ToggleLikeHandler, WatchCommentsHandler,
};
pub use handlers::onboarding::{
    AuthCallbackHandler, CompleteProfileHandler, GuardConfig, GuardStatus, ProfileCompletionWorkflow,
    RegisterHandler, ResolveDestinationHandler, RouteGuard, SignInHandler, SignOutHandler,
    SubmitSurveyHandler,
};
