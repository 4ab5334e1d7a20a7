// Copyright (c) 2025 bleach.fish. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Route handlers.

pub mod commit;
pub mod exchange;
