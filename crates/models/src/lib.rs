pub mod cell;
pub mod department;
pub mod member;
pub mod page;
pub mod patch;
pub mod user;

// Re-export commonly used types
pub use cell::{Cell, CellOverview, NewCell, UpdateCell};
pub use department::{
    Department, DepartmentWithMemberCount, NewDepartment, RosterEntry, SyncDepartmentMembers,
};
pub use member::{Member, MemberFilter, MemberSummary, NewMember, UpdateMember};
pub use page::{Page, PageRequest};
pub use patch::Patch;
pub use user::{ChangePassword, Credentials, NewUser, RegisterUser, Role, UpdateUser, User, UserProfile};
