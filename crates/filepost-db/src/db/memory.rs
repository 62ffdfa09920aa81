//! In-memory post repository.

use async_trait::async_trait;
use filepost_core::models::Post;
use filepost_core::AppError;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::post::PostRepository;

/// Process-local record store, selected with `DATABASE_URL=memory://`.
///
/// Records are kept in insertion order and lost on restart.
#[derive(Default)]
pub struct MemoryPostRepository {
    posts: RwLock<Vec<Post>>,
}

impl MemoryPostRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PostRepository for MemoryPostRepository {
    async fn insert(&self, post: &Post) -> Result<Post, AppError> {
        let mut posts = self.posts.write().await;
        if posts.iter().any(|p| p.id == post.id || p.key == post.key) {
            return Err(AppError::Internal(format!(
                "Duplicate post id or key: {}",
                post.key
            )));
        }
        posts.push(post.clone());
        Ok(post.clone())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Post>, AppError> {
        Ok(self.posts.read().await.iter().find(|p| p.id == id).cloned())
    }

    async fn list(&self) -> Result<Vec<Post>, AppError> {
        Ok(self.posts.read().await.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let mut posts = self.posts.write().await;
        let before = posts.len();
        posts.retain(|p| p.id != id);
        Ok(posts.len() != before)
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use filepost_core::models::NewPost;
    use filepost_core::StorageBackend;

    fn new_post(key: &str) -> Post {
        NewPost {
            name: "cat.png".to_string(),
            size: 10,
            key: key.to_string(),
            url: format!("http://localhost:3000/files/{}", key),
            backend: StorageBackend::Local,
        }
        .into_post()
    }

    #[tokio::test]
    async fn insert_get_list_delete() {
        let repo = MemoryPostRepository::new();
        let first = repo.insert(&new_post("a-cat.png")).await.unwrap();
        let second = repo.insert(&new_post("b-cat.png")).await.unwrap();

        assert_eq!(repo.get(first.id).await.unwrap(), Some(first.clone()));

        let listed = repo.list().await.unwrap();
        assert_eq!(listed, vec![first.clone(), second.clone()]);

        assert!(repo.delete(first.id).await.unwrap());
        assert!(!repo.delete(first.id).await.unwrap());
        assert_eq!(repo.list().await.unwrap(), vec![second]);
        assert!(repo.get(first.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn rejects_duplicate_keys() {
        let repo = MemoryPostRepository::new();
        repo.insert(&new_post("same-cat.png")).await.unwrap();
        assert!(repo.insert(&new_post("same-cat.png")).await.is_err());
        assert_eq!(repo.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn ping_always_succeeds() {
        assert!(MemoryPostRepository::new().ping().await.is_ok());
    }
}
