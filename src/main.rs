// Copyright 2025 the Runebender Xilem Authors
// SPDX-License-Identifier: Apache-2.0

//! Outline editor: replay a scripted editing session against a glyph

fn main() -> anyhow::Result<()> {
    outline_editor::run()
}
