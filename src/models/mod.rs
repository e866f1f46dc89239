mod application;
mod post;
mod projection;
mod state;
mod user;

pub use application::{Application, ApplicationRecord, ApplicationStatus, FeedbackFilter};
pub use post::{
    Comment, CommentAuthor, CommentWithAuthor, NewPost, Post, PostChanges, PostDetail,
    PostWithComments, PostWithTags, Tag,
};
pub use projection::{CandidateProfile, FeedbackCandidate};
pub use state::AppState;
pub use user::{Applicant, User, UserType, UserWithApplicant};
