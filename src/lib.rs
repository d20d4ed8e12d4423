//! # super4pcs-core
//!
//! `super4pcs-core` is a Rust library with the spatial search primitives of the Super4PCS
//! point cloud registration algorithm. It can be used from Rust and compiled to
//! WebAssembly (WASM).
//!
//! ## Features
//!
//! - **Pair extraction**: finds every pair of points at a given distance, within a tolerance,
//!   by recursive subdivision of the unit cube against a set of spheres.
//! - **Normal-indexed grids**: buckets oriented points by position and normal direction, with a
//!   regular angular grid or HEALPix cells, and answers cone queries on normals.
//! - **Congruent set search**: combines two pair sets into quadrilaterals whose intersection
//!   ratios and segment angle match a reference base.
//! - **Parallel**: node and sphere tests run on `rayon`, with `wasm-bindgen-rayon` in the browser.
//!
//! ## Main Interface
//!
//! The primary entry point is [`CongruentMatcher`], which maps a point set into the unit cube,
//! extracts pairs for a base segment and searches congruent quadrilaterals.

mod bounds;
pub mod error;
pub mod matcher;
pub mod normalset;
pub mod options;
pub mod pair_creation;
pub mod pair_extraction;
pub mod point;
pub mod primitive;
pub mod wasm;

pub use bounds::BoundingBox;
pub use error::{CoreError, CoreResult};
pub use matcher::{CongruentMatcher, Quadrilateral, segment_invariants};
pub use normalset::{IndexedNormalHealSet, IndexedNormalSet, NormalIndex};
pub use options::MatchOptions;
pub use pair_creation::{DefaultPairFilter, DummyPairFilter, PairCreationFunctor, PairFilter};
pub use pair_extraction::{BruteForceFunctor, IntersectionFunctor, IntersectionStrategy, NdNode, PairProcessor};
pub use point::Point3D;
pub use primitive::HyperSphere;
