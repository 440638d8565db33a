//! Raster painting core.
//!
//! This crate holds the canvas side of the adaptive painting engine: RGBA
//! pixel surfaces with an explicit commit step, stroke rasterization from
//! pointer contact points, bounded undo snapshots over the canvas/result
//! buffer pair, and a magnifier controller that eases through a discrete
//! zoom ladder.
//!
//! Foreground work is split into two phases per frame: `Painter::simulate`
//! mutates state and accumulates pending pixel writes, `Painter::commit`
//! applies the pending set atomically and publishes the buffers.

pub mod brush;
pub mod color;
pub mod config;
pub mod event;
pub mod export;
pub mod history;
pub mod magnifier;
pub mod painter;
pub mod stroke;
pub mod surface;
