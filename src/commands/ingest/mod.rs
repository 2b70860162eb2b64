use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use chrono::{NaiveDate, Utc};
use regex::Regex;
use serde::Deserialize;
use tracing::{info, warn};

use crate::cli::{IngestArgs, UploadMode};
use crate::config::{NotifyConfig, StoreConfig, UploadSettings, run_offset};
use crate::model::{
    BatchFailure, FieldValue, NormalizedRecord, ReportCounts, ReportSettings, ReportSource,
    UploadFailure, UploadResult, UploadRunReport, UploadState,
};
use crate::notify;
use crate::store::{RecordStore, open_store};
use crate::util::{local_date, now_utc_string, sha256_file, utc_compact_string, write_json_pretty};

pub const REPORT_FILE_PREFIX: &str = "upload_run_";
const REPORT_MANIFEST_VERSION: u32 = 1;

mod field_map;
mod normalize;
mod prepare;
mod report;
mod row_parse;
mod run;
mod uploader;

pub use run::run;

use field_map::*;
use normalize::*;
use prepare::*;
use report::*;
use row_parse::*;
use uploader::*;
