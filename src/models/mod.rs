//! Data models
//!
//! This module contains all data structures used throughout the TubeDesk
//! backend. Models represent:
//! - Database entities (User, Channel, Video, VideoCategory, Campaign,
//!   RevenueEntry, Task, TaskComment)
//! - Pagination helpers shared by repositories and the API layer

mod campaign;
mod channel;
mod paging;
mod revenue;
mod task;
mod user;
mod video;
mod video_category;

pub use campaign::{Campaign, CampaignStatus, CreateCampaignInput, UpdateCampaignInput};
pub use channel::{Channel, CreateChannelInput, UpdateChannelInput};
pub use paging::ListParams;
pub use revenue::{CreateRevenueInput, RevenueEntry, RevenueSummary};
pub use task::{
    CreateTaskInput, Task, TaskComment, TaskPriority, TaskStatus, UpdateTaskInput,
};
pub use user::{UpdateUserInput, User, UserRole, UserStatus};
pub use video::{CreateVideoInput, UpdateVideoInput, Video, VideoFilter};
pub use video_category::{CreateCategoryInput, UpdateCategoryInput, VideoCategory};
