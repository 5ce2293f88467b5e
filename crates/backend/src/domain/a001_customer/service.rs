use super::repository::{self, CustomerFilter};
use crate::shared::error::ValidationError;
use contracts::domain::a001_customer::{Customer, CustomerDto};
use uuid::Uuid;

fn generate_code() -> String {
    let simple = Uuid::new_v4().simple().to_string();
    format!("CUS-{}", simple[..8].to_uppercase())
}

/// Creates a customer; a blank code gets a generated one
pub async fn create(dto: CustomerDto) -> anyhow::Result<Uuid> {
    let mut aggregate = Customer::new_for_insert(generate_code(), &dto);

    aggregate.validate().map_err(ValidationError)?;
    aggregate.before_write();

    repository::insert(&aggregate).await
}

/// Updates a customer; `Ok(false)` when it does not exist
pub async fn update(id: Uuid, dto: CustomerDto) -> anyhow::Result<bool> {
    let Some(mut aggregate) = repository::get_by_id(id).await? else {
        return Ok(false);
    };

    aggregate.update(&dto);
    aggregate.validate().map_err(ValidationError)?;
    aggregate.before_write();

    repository::update(&aggregate).await?;
    Ok(true)
}

/// Soft delete
pub async fn delete(id: Uuid) -> anyhow::Result<bool> {
    repository::soft_delete(id).await
}

pub async fn get_by_id(id: Uuid) -> anyhow::Result<Option<Customer>> {
    repository::get_by_id(id).await
}

pub async fn list(filter: &CustomerFilter) -> anyhow::Result<Vec<Customer>> {
    repository::list(filter).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_code_shape() {
        let code = generate_code();
        assert!(code.starts_with("CUS-"));
        assert_eq!(code.len(), 12);
    }
}
