//! Route path constants.

pub const GET_HEALTH: &str = "/health";

pub const POST_AUTH_LOGIN: &str = "/auth/login";
pub const POST_AUTH_REFRESH: &str = "/auth/refresh";
pub const POST_AUTH_LOGOUT: &str = "/auth/logout";

/// `GET` lists, `POST` creates.
pub const USERS: &str = "/users";
/// `PATCH` updates, `DELETE` removes.
pub const USERS_ID: &str = "/users/{id}";

pub const GET_AUDIT: &str = "/audit";

pub const GET_MC_HEALTH: &str = "/mc/health";
pub const GET_MC_PLAYERS: &str = "/mc/players";
pub const GET_MC_PLAYER_UUID: &str = "/mc/player/{uuid}";
pub const GET_MC_PLAYER_UUID_INVENTORY: &str = "/mc/player/{uuid}/inventory";
pub const GET_MC_PLAYER_UUID_ENDERCHEST: &str = "/mc/player/{uuid}/enderchest";
pub const GET_MC_WHITELIST: &str = "/mc/whitelist";
pub const POST_MC_WHITELIST_ADD: &str = "/mc/whitelist/add";
pub const POST_MC_WHITELIST_REMOVE: &str = "/mc/whitelist/remove";
pub const POST_MC_COMMAND: &str = "/mc/command";

/// Plugin-side paths the `/mc` routes forward to.
pub mod plugin {
    pub const HEALTH: &str = "/api/health";
    pub const PLAYERS: &str = "/api/players";
    pub const WHITELIST: &str = "/api/whitelist";
    pub const WHITELIST_ADD: &str = "/api/whitelist/add";
    pub const WHITELIST_REMOVE: &str = "/api/whitelist/remove";
    pub const COMMAND: &str = "/api/command";

    pub fn player(uuid: &str) -> String {
        format!("/api/player/{uuid}")
    }

    pub fn inventory(uuid: &str) -> String {
        format!("/api/player/{uuid}/inventory")
    }

    pub fn enderchest(uuid: &str) -> String {
        format!("/api/player/{uuid}/enderchest")
    }
}
