/// Registration input, password still in clear text.
#[derive(Debug, Clone)]
pub struct CreateUserDto {
    pub name: String,
    pub email: String,
    pub password: String,
    pub is_admin: bool,
}
