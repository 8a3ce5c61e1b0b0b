//! Shared list driver: builds a list screen, applies filters, walks to the
//! requested page and renders it.

use std::num::NonZeroUsize;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tabled::Tabled;
use tracing::debug;

use flock_core::{
    AllowAll, ApiSource, AsyncState, FilterValue, ListScreen, PageChange, Row, ServiceConfig,
    SortDirection, is_sort_key,
};

use crate::cli::{GlobalOpts, ListArgs};
use crate::error::CliError;
use crate::output;

type Screen<T> = ListScreen<T, ApiSource<T>>;

/// Parse `key=value`. Empty values unset the key; `true`/`false` are flags.
pub fn parse_filter(raw: &str) -> Result<(String, Option<FilterValue>), CliError> {
    let (key, value) = raw.split_once('=').ok_or_else(|| CliError::Validation {
        field: "filter".into(),
        reason: format!("expected KEY=VALUE, got '{raw}'"),
    })?;
    let key = key.trim();
    if key.is_empty() {
        return Err(CliError::Validation {
            field: "filter".into(),
            reason: format!("missing key in '{raw}'"),
        });
    }
    if is_sort_key(key) {
        return Err(CliError::Validation {
            field: "filter".into(),
            reason: format!("'{key}' is a sort key; use --sort / --desc instead"),
        });
    }
    let value = match value.trim() {
        "" => None,
        "true" => Some(FilterValue::Flag(true)),
        "false" => Some(FilterValue::Flag(false)),
        v => Some(FilterValue::Text(v.to_owned())),
    };
    Ok((key.to_owned(), value))
}

fn page_size_for<T: Row>(service: &ServiceConfig, args: &ListArgs) -> Result<NonZeroUsize, CliError> {
    match args.page_size {
        Some(n) => NonZeroUsize::new(n).ok_or_else(|| CliError::Validation {
            field: "page-size".into(),
            reason: "must be greater than zero".into(),
        }),
        None => Ok(service.page_sizes.for_kind(T::KIND)),
    }
}

fn apply_args<T: Row + DeserializeOwned>(screen: &Screen<T>, args: &ListArgs) -> Result<(), CliError> {
    let filters = args
        .filter
        .iter()
        .map(|raw| parse_filter(raw))
        .collect::<Result<Vec<_>, _>>()?;
    if !filters.is_empty() {
        screen.filters().apply_filters(filters);
    }
    if let Some(ref field) = args.sort {
        let direction = if args.desc {
            SortDirection::Descending
        } else {
            SortDirection::Ascending
        };
        screen.filters().set_sorting(field.clone(), direction);
    }
    Ok(())
}

async fn load_pages<T: Row + DeserializeOwned>(screen: &Screen<T>, args: &ListArgs) -> Result<(), CliError> {
    screen.load().await?;

    if args.all {
        let mut page = 1;
        loop {
            page += 1;
            match screen.service().handle_pagination(page).await {
                PageChange::Fetched { .. } | PageChange::Moved { .. } => {}
                PageChange::Failed(err) => return Err(err.into()),
                other => {
                    debug!(page, outcome = ?other, "stopped paging");
                    break;
                }
            }
        }
        return Ok(());
    }

    if args.page > 1 {
        match screen.service().handle_pagination(args.page).await {
            PageChange::Failed(err) => return Err(err.into()),
            PageChange::EndOfData => debug!(page = args.page, "requested page is past the end"),
            other => debug!(page = args.page, outcome = ?other, "page change"),
        }
    }
    Ok(())
}

/// Run `list` for one resource kind.
pub async fn run<T, R>(
    service: &ServiceConfig,
    args: ListArgs,
    global: &GlobalOpts,
    to_row: impl Fn(&Arc<T>) -> R,
    id_fn: impl Fn(&Arc<T>) -> String,
) -> Result<(), CliError>
where
    T: Row + DeserializeOwned + Serialize,
    R: Tabled,
{
    if args.page == 0 {
        return Err(CliError::Validation {
            field: "page".into(),
            reason: "pages start at 1".into(),
        });
    }

    let page_size = page_size_for::<T>(service, &args)?;
    let client = service.build_client()?;
    let screen: Screen<T> = ListScreen::new(ApiSource::new(client), page_size, Arc::new(AllowAll));
    apply_args(&screen, &args)?;

    let spinner = output::spinner(global, format!("Loading {}...", T::KIND.label()));
    let loaded = load_pages(&screen, &args).await;
    spinner.finish_and_clear();
    loaded?;

    let view = match screen.state() {
        AsyncState::Success { data } => data,
        AsyncState::PermissionError {
            required_capability,
        } => {
            return Err(CliError::PermissionDenied {
                capability: required_capability,
            });
        }
        AsyncState::Error { message, .. } => return Err(CliError::FetchFailed { message }),
        AsyncState::Idle | AsyncState::Loading { .. } => {
            return Err(CliError::Internal("list did not finish loading".into()));
        }
    };

    let rows: Vec<Arc<T>> = if args.all {
        screen.pagination().snapshot().rows().to_vec()
    } else {
        view.rows().to_vec()
    };

    let out = output::render_list(&global.output, &rows, to_row, id_fn)?;
    output::print_output(&out, global.quiet);
    if !args.all {
        output::page_footer(
            global,
            view.pagination.current,
            view.pagination.page_count(),
            view.total,
        );
    }
    Ok(())
}
