//! 产品（Product）
//!
//! 由管理员创建，被单件引用后只允许改名。
//!
use crate::error::{DomainError, DomainResult};
use crate::value_object::ProductId;
use bon::Builder;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    id: ProductId,
    name: String,
    model_number: String,
    description: Option<String>,
    image_url: Option<String>,
    created_at: DateTime<Utc>,
}

/// 新建产品的输入
#[derive(Builder, Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    #[builder(into)]
    pub name: String,
    #[builder(into)]
    pub model_number: String,
    #[builder(into)]
    pub description: Option<String>,
    #[builder(into)]
    pub image_url: Option<String>,
}

/// 下拉选择用的精简视图
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductOption {
    pub id: ProductId,
    pub name: String,
    pub model_number: String,
}

impl Product {
    pub fn create(id: ProductId, input: NewProduct, at: DateTime<Utc>) -> DomainResult<Self> {
        let name = required("name", &input.name)?;
        let model_number = required("model number", &input.model_number)?;
        let image_url = match optional(input.image_url) {
            Some(url) if !(url.starts_with("http://") || url.starts_with("https://")) => {
                return Err(DomainError::validation(format!(
                    "image url must be an http(s) url, got {url:?}"
                )));
            }
            other => other,
        };

        Ok(Self {
            id,
            name,
            model_number,
            description: optional(input.description),
            image_url,
            created_at: at,
        })
    }

    pub fn rename(&mut self, name: &str) -> DomainResult<()> {
        self.name = required("name", name)?;
        Ok(())
    }

    pub fn id(&self) -> &ProductId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn model_number(&self) -> &str {
        &self.model_number
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn image_url(&self) -> Option<&str> {
        self.image_url.as_deref()
    }

    pub fn created_at(&self) -> &DateTime<Utc> {
        &self.created_at
    }

    pub fn option(&self) -> ProductOption {
        ProductOption {
            id: self.id,
            name: self.name.clone(),
            model_number: self.model_number.clone(),
        }
    }
}

fn required(field: &str, value: &str) -> DomainResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(DomainError::validation(format!("product {field} is required")));
    }
    Ok(value.to_string())
}

fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
