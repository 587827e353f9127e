// GeoServer REST administration API
//
// Hand-written client for the `/rest` endpoints used to provision shapefile
// layers, plus the `/ows` WFS export used to pull them back out.

pub mod client;
pub mod datastores;
pub mod featuretypes;
pub mod models;
pub mod ows;
pub mod uploads;
pub mod workspaces;

pub use client::GeoServerClient;
