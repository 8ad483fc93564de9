//! Application Services
//!
//! Business logic services that coordinate domain operations.
//!
//! ## Available Services
//!
//! - **AuthService**: Registration, login, JWT access tokens
//! - **MemberService**: Member profiles, credentials and member moderation
//! - **PostService**: Posts, comments, likes, threads and post moderation

pub mod auth_service;
pub mod member_service;
pub mod post_service;

// Re-export auth service types
pub use auth_service::{
    decode_access_token, issue_access_token, AuthError, AuthService, AuthServiceImpl, AuthTokens,
    Claims,
};

// Re-export member service types
pub use member_service::{CreateMemberDto, EditMemberDto, MemberError, MemberService, MemberServiceImpl};

// Re-export post service types
pub use post_service::{NewPostDto, PostError, PostService, PostServiceImpl};
