// SPDX-FileCopyrightText: 2026 Coffer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait seams between the vault engine and its persistence backends.

pub mod container;

pub use container::ContainerBackend;
