//! Application use cases and transactions.

mod audit;
mod change;
mod location;
mod session;
mod tree;
mod user;

pub use audit::{log_add, log_search, LogEntryDto, LogType};
pub use change::{
    change_accept, change_create, change_get, change_log_search, change_reject,
    change_time_bounds, ChangeCreateReq, ChangeDto, ChangeLogFilter, ChangeLogRow,
    CHANGE_TIME_FORMAT,
};
pub use location::{
    location_forget, location_list, location_make, location_mapper, location_new, pending_changes,
    LocationRow,
};
pub use session::{session_close, session_open};
pub use tree::{
    tree_all, tree_create, tree_find, tree_find_by_name, tree_preference, tree_set_preference,
    tree_titles,
};
pub use user::{
    user_administrators, user_all, user_all_logged_in, user_check_password, user_create,
    user_delete, user_find, user_find_by_email, user_find_by_identifier, user_find_by_individual,
    user_find_by_user_name, user_managers, user_moderators, user_preference, user_set_password,
    user_set_preference, user_set_tree_preference, user_tree_preference, user_unapproved,
    user_unverified, user_update, UserCreateReq, UserUpdateReq,
};
