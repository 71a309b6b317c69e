/// Partial update of a user record.
///
/// `None` and empty strings both leave the field untouched.
#[derive(Debug, Clone, Default)]
pub struct UpdateUserDto {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

impl UpdateUserDto {
    pub fn name(&self) -> Option<&str> {
        non_empty(&self.name)
    }

    pub fn email(&self) -> Option<&str> {
        non_empty(&self.email)
    }

    pub fn password(&self) -> Option<&str> {
        non_empty(&self.password)
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}
