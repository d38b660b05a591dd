use crate::clock::Clock;
use crate::command::Command;
use crate::command_handler::CommandHandler;
use crate::context::AppContext;
use crate::error::AppError;
use assembly_domain::access::Action;
use assembly_domain::error::DomainError;
use assembly_domain::persist::ProductRepository;
use assembly_domain::product::{NewProduct, Product};
use assembly_domain::value_object::ProductId;
use async_trait::async_trait;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct CreateProduct(pub NewProduct);

impl Command for CreateProduct {
    const NAME: &'static str = "product.create";
    type Output = Product;

    fn action(&self) -> Action {
        Action::ManageProducts
    }
}

pub struct CreateProductHandler {
    products: Arc<dyn ProductRepository>,
    clock: Arc<dyn Clock>,
}

impl CreateProductHandler {
    pub fn new(products: Arc<dyn ProductRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { products, clock }
    }
}

#[async_trait]
impl CommandHandler<CreateProduct> for CreateProductHandler {
    async fn handle(&self, _ctx: &AppContext, cmd: CreateProduct) -> Result<Product, AppError> {
        let product = Product::create(ProductId::generate(), cmd.0, self.clock.now())?;
        self.products.insert_product(product.clone()).await?;
        tracing::info!(product = %product.id(), name = product.name(), "product created");
        Ok(product)
    }
}

#[derive(Debug, Clone)]
pub struct RenameProduct {
    pub product_id: ProductId,
    pub name: String,
}

impl Command for RenameProduct {
    const NAME: &'static str = "product.rename";
    type Output = Product;

    fn action(&self) -> Action {
        Action::ManageProducts
    }
}

pub struct RenameProductHandler {
    products: Arc<dyn ProductRepository>,
}

impl RenameProductHandler {
    pub fn new(products: Arc<dyn ProductRepository>) -> Self {
        Self { products }
    }
}

#[async_trait]
impl CommandHandler<RenameProduct> for RenameProductHandler {
    async fn handle(&self, _ctx: &AppContext, cmd: RenameProduct) -> Result<Product, AppError> {
        let mut product = self
            .products
            .find_product(&cmd.product_id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("product {} not found", cmd.product_id)))?;
        product.rename(&cmd.name)?;
        self.products.update_product(product.clone()).await?;
        Ok(product)
    }
}
