// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! [Cucumber]-style runner of `.feature` files driving browser automation
//! sessions.
//!
//! `.feature` files are parsed by a [`Parser`] into [`Feature`]s, whose
//! [`Scenario`]s are executed by a [`Runner`] against the registered
//! [`step::Collection`], emitting [`Event`]s consumed by a [`Writer`].
//!
//! Every [`Scenario`] gets its own [`World`] wrapping a fresh browser
//! [`Session`]. When a [`Scenario`] fails, a screenshot of the page is
//! attached to its failure as an [`Artifact`].
//!
//! [Cucumber]: https://cucumber.io

#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![forbid(non_ascii_idents, unsafe_code)]
#![warn(missing_docs)]

pub mod cli;
mod cucumber;
pub mod data_table;
pub mod error;
pub mod event;
pub mod feature;
pub mod parser;
pub mod runner;
pub mod step;
pub mod tag;
pub mod world;
pub mod writer;

#[doc(inline)]
pub use self::{
    cucumber::{Cucumber, DefaultWriter},
    data_table::DataTable,
    event::Cucumber as Event,
    feature::{Background, Feature, Keyword, Scenario, Step, StepType},
    parser::Parser,
    runner::Runner,
    world::{Artifact, Session, World},
    writer::{
        Arbitrary as ArbitraryWriter, Ext as WriterExt, Stats as StatsWriter,
        Writer,
    },
};
