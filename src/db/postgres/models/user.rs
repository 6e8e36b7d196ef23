/// A Telegram user registering through `/start`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NewUser {
    pub tg_id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}
