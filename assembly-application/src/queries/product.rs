use crate::context::AppContext;
use crate::error::AppError;
use crate::query::Query;
use crate::query_handler::QueryHandler;
use assembly_domain::error::DomainError;
use assembly_domain::persist::ProductRepository;
use assembly_domain::product::{Product, ProductOption};
use assembly_domain::value_object::ProductId;
use async_trait::async_trait;
use std::cmp::Reverse;
use std::sync::Arc;

/// 全部产品，最新创建的在前
#[derive(Debug, Clone, Copy)]
pub struct GetAllProducts;

impl Query for GetAllProducts {
    const NAME: &'static str = "product.getAll";
    type Dto = Vec<Product>;
}

#[derive(Debug, Clone, Copy)]
pub struct GetProductById {
    pub product_id: ProductId,
}

impl Query for GetProductById {
    const NAME: &'static str = "product.getById";
    type Dto = Product;
}

/// 下拉选择用的产品列表，按名称排序
#[derive(Debug, Clone, Copy)]
pub struct ListProductOptions;

impl Query for ListProductOptions {
    const NAME: &'static str = "product.getAllProducts";
    type Dto = Vec<ProductOption>;
}

pub struct ProductQueryHandler {
    products: Arc<dyn ProductRepository>,
}

impl ProductQueryHandler {
    pub fn new(products: Arc<dyn ProductRepository>) -> Self {
        Self { products }
    }
}

#[async_trait]
impl QueryHandler<GetAllProducts> for ProductQueryHandler {
    async fn handle(&self, _ctx: &AppContext, _q: GetAllProducts) -> Result<Vec<Product>, AppError> {
        let mut products = self.products.list_products().await?;
        products.sort_by_key(|p| Reverse(*p.created_at()));
        Ok(products)
    }
}

#[async_trait]
impl QueryHandler<GetProductById> for ProductQueryHandler {
    async fn handle(&self, _ctx: &AppContext, q: GetProductById) -> Result<Product, AppError> {
        let product = self
            .products
            .find_product(&q.product_id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("product {} not found", q.product_id)))?;
        Ok(product)
    }
}

#[async_trait]
impl QueryHandler<ListProductOptions> for ProductQueryHandler {
    async fn handle(
        &self,
        _ctx: &AppContext,
        _q: ListProductOptions,
    ) -> Result<Vec<ProductOption>, AppError> {
        let mut options: Vec<ProductOption> = self
            .products
            .list_products()
            .await?
            .iter()
            .map(Product::option)
            .collect();
        options.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.model_number.cmp(&b.model_number)));
        Ok(options)
    }
}
