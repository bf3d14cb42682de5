//! # API Facade
//!
//! The API layer is a thin facade over the command layer and the single entry point
//! for every brigid operation, whatever drives it.
//!
//! The facade:
//! - **Dispatches** to the matching `commands::*::run`
//! - **Normalizes inputs**: identifiers arrive as strings and are parsed into
//!   [`Identifier`] here
//! - **Returns structured types** (`Result<CmdResult>`), never text
//!
//! Rendering, printing and exit codes belong to the CLI layer.
//!
//! `BrigidApi<C: ApiClient>` is generic over the transport: production uses
//! [`HttpClient`](crate::client::http::HttpClient), tests use
//! [`InMemoryClient`](crate::client::memory::InMemoryClient).

use crate::client::ApiClient;
use crate::commands::{self, list::ListRequest, CmdResult};
use crate::error::Result;
use crate::model::Identifier;
use crate::resources::EndpointDescriptor;
use serde_json::Value;

pub struct BrigidApi<C: ApiClient> {
    client: C,
}

impl<C: ApiClient> BrigidApi<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn resolve(&self, descriptor: &EndpointDescriptor, identifier: &str) -> Result<i64> {
        commands::resolve::resolve(&self.client, descriptor, &parse_identifier(identifier))
    }

    pub fn list(
        &self,
        descriptor: &EndpointDescriptor,
        request: &ListRequest,
    ) -> Result<CmdResult> {
        commands::list::run(&self.client, descriptor, request)
    }

    pub fn retrieve(
        &self,
        descriptor: &EndpointDescriptor,
        identifier: &str,
        expand: Option<&str>,
    ) -> Result<CmdResult> {
        commands::retrieve::run(
            &self.client,
            descriptor,
            &parse_identifier(identifier),
            expand,
        )
    }

    pub fn create(&mut self, descriptor: &EndpointDescriptor, fields: Value) -> Result<CmdResult> {
        commands::create::run(&mut self.client, descriptor, fields)
    }

    pub fn partial_update(
        &mut self,
        descriptor: &EndpointDescriptor,
        identifier: &str,
        fields: &[(String, Value)],
    ) -> Result<CmdResult> {
        commands::update::run(
            &mut self.client,
            descriptor,
            &parse_identifier(identifier),
            fields,
        )
    }

    pub fn delete(&mut self, descriptor: &EndpointDescriptor, identifier: &str) -> Result<CmdResult> {
        commands::delete::run(&mut self.client, descriptor, &parse_identifier(identifier))
    }

    pub fn sync(&mut self, descriptor: &EndpointDescriptor, identifier: &str) -> Result<CmdResult> {
        commands::sync::run(&mut self.client, descriptor, &parse_identifier(identifier))
    }

    pub fn import_software(&mut self, url: &str) -> Result<CmdResult> {
        commands::import::software(&mut self.client, url)
    }

    pub fn import_release(&mut self, software: &str, version: &str) -> Result<CmdResult> {
        commands::import::release(&mut self.client, &parse_identifier(software), version)
    }

    pub fn import_all_releases(&mut self, software: &str) -> Result<CmdResult> {
        commands::import::all_releases(&mut self.client, &parse_identifier(software))
    }
}

fn parse_identifier(raw: &str) -> Identifier {
    match raw.parse() {
        Ok(identifier) => identifier,
        Err(never) => match never {},
    }
}
