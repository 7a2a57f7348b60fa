use crate::model::{User, UserCreate, UserId, UserUpdate};
use crate::user_actor::UserError;
use async_trait::async_trait;
use store_actor::{EntityClient, StoreClient, StoreError, Versioned};
use tracing::{debug, instrument};

/// Client for interacting with the User actor.
#[derive(Clone)]
pub struct UserClient {
    inner: StoreClient<User>,
}

impl UserClient {
    pub fn new(inner: StoreClient<User>) -> Self {
        Self { inner }
    }

    #[instrument(skip(self, params))]
    pub async fn create_user(&self, id: UserId, params: UserCreate) -> Result<User, UserError> {
        debug!("Sending request");
        self.inner
            .create(id, params)
            .await
            .map(|created| created.value)
            .map_err(Self::map_error)
    }

    #[instrument(skip(self, update))]
    pub async fn update_user(&self, id: UserId, update: UserUpdate) -> Result<User, UserError> {
        debug!("Sending request");
        self.inner
            .update(id, update)
            .await
            .map(|updated| updated.value)
            .map_err(Self::map_error)
    }

    /// Fetch a user without its version.
    pub async fn find(&self, id: UserId) -> Result<Option<User>, UserError> {
        self.get(id)
            .await
            .map(|found| found.map(|Versioned { value, .. }| value))
    }
}

#[async_trait]
impl EntityClient<User> for UserClient {
    type Error = UserError;

    fn inner(&self) -> &StoreClient<User> {
        &self.inner
    }

    fn map_error(e: StoreError) -> Self::Error {
        if let Some(entity) = e.entity_error::<UserError>() {
            return entity.clone();
        }
        match e {
            StoreError::NotFound(id) => UserError::NotFound(id),
            StoreError::AlreadyExists(id) => UserError::AlreadyExists(id),
            other => UserError::ActorCommunicationError(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use store_actor::mock::{create_mock_client, expect_get};

    #[tokio::test]
    async fn test_find_maps_closed_actor() {
        let (client, receiver) = create_mock_client::<User>(1);
        drop(receiver);
        let users = UserClient::new(client);

        let result = users.find(UserId(1)).await;
        assert!(matches!(result, Err(UserError::ActorCommunicationError(_))));
    }

    #[tokio::test]
    async fn test_find_strips_version() {
        let (client, mut receiver) = create_mock_client::<User>(1);
        let users = UserClient::new(client);
        let task = tokio::spawn(async move { users.find(UserId(4)).await });

        let (id, responder) = expect_get(&mut receiver).await.expect("Expected Get request");
        assert_eq!(id, UserId(4));
        responder.send(Ok(None)).unwrap();

        assert_eq!(task.await.unwrap(), Ok(None));
    }
}
