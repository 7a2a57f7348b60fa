//! [`StoreEntity`] implementation for [`User`].

use super::UserError;
use crate::model::{hash_password, User, UserCreate, UserDelete, UserId, UserUpdate};
use store_actor::StoreEntity;

fn require(field: &str, value: &str) -> Result<(), UserError> {
    if value.trim().is_empty() {
        Err(UserError::ValidationError(format!("{field} must not be empty")))
    } else {
        Ok(())
    }
}

impl StoreEntity for User {
    type Id = UserId;
    type Create = UserCreate;
    type Update = UserUpdate;
    type Delete = UserDelete;
    type Action = ();
    type ActionResult = ();
    type Error = UserError;

    fn from_create_params(id: UserId, params: UserCreate) -> Result<Self, Self::Error> {
        require("username", &params.username)?;
        require("email", &params.email)?;
        require("password", &params.password)?;
        Ok(Self {
            id,
            username: params.username,
            email: params.email,
            password: hash_password(&params.password),
        })
    }

    fn on_update(&mut self, update: UserUpdate) -> Result<(), Self::Error> {
        if let Some(username) = update.username {
            require("username", &username)?;
            self.username = username;
        }
        if let Some(email) = update.email {
            require("email", &email)?;
            self.email = email;
        }
        if let Some(password) = update.password {
            require("password", &password)?;
            self.password = hash_password(&password);
        }
        Ok(())
    }

    fn on_delete(&self, confirm: &UserDelete) -> Result<(), Self::Error> {
        let matches = confirm.username == self.username
            && confirm.email == self.email
            && hash_password(&confirm.password) == self.password;
        if matches {
            Ok(())
        } else {
            Err(UserError::Mismatch(self.id.to_string()))
        }
    }

    fn handle_action(&mut self, _action: ()) -> Result<(), Self::Error> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> User {
        User::from_create_params(
            UserId(1),
            UserCreate {
                username: "alice".into(),
                email: "alice@example.com".into(),
                password: "secret".into(),
            },
        )
        .unwrap()
    }

    #[test]
    fn test_password_is_hashed() {
        let user = alice();
        assert_ne!(user.password, "secret");
        assert_eq!(user.password, hash_password("secret"));
    }

    #[test]
    fn test_empty_fields_rejected() {
        let result = User::from_create_params(
            UserId(2),
            UserCreate {
                username: " ".into(),
                email: "b@example.com".into(),
                password: "pw".into(),
            },
        );
        assert!(matches!(result, Err(UserError::ValidationError(_))));
    }

    #[test]
    fn test_delete_requires_matching_credentials() {
        let user = alice();
        let wrong = UserDelete {
            username: "alice".into(),
            email: "alice@example.com".into(),
            password: "guess".into(),
        };
        assert!(matches!(user.on_delete(&wrong), Err(UserError::Mismatch(_))));

        let right = UserDelete {
            password: "secret".into(),
            ..wrong
        };
        assert!(user.on_delete(&right).is_ok());
    }
}
