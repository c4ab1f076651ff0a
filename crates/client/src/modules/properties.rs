//! Property listings module.

use std::any::Any;

use rentora_domain::{Page, Property, PropertyFilter, Result, RoomType};

use super::{ensure_positive_id, to_params, ModuleContext};
use crate::client::RentoraClient;
use crate::config::ApiVersion;
use crate::registry::ApiModule;

/// Access to `/v2/properties`.
#[derive(Clone)]
pub struct PropertiesApi {
    ctx: ModuleContext,
}

impl PropertiesApi {
    pub(crate) fn new(client: &RentoraClient) -> Self {
        Self { ctx: ModuleContext::new(client, "/properties", ApiVersion::V2) }
    }

    /// List properties matching the filter.
    pub async fn list(&self, filter: &PropertyFilter) -> Result<Page<Property>> {
        self.ctx.get("", Some(to_params(filter)?)).await
    }

    /// Fetch a single property.
    pub async fn get(&self, property_id: i64) -> Result<Property> {
        ensure_positive_id("property id", property_id)?;
        self.ctx.get(&format!("/{property_id}"), None).await
    }

    /// List the room types of a property.
    pub async fn rooms(&self, property_id: i64) -> Result<Vec<RoomType>> {
        ensure_positive_id("property id", property_id)?;
        self.ctx.get(&format!("/{property_id}/rooms"), None).await
    }
}

impl ApiModule for PropertiesApi {
    fn name(&self) -> &'static str {
        "properties"
    }

    fn version(&self) -> ApiVersion {
        ApiVersion::V2
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
