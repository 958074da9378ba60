pub mod info_card;
pub mod utility_commands;

use crate::core::history::HistoryService;
use crate::core::lookups::LookupService;
use crate::core::media::MediaService;

pub use utility_commands::utility_commands;

/// Services every utility command handler can reach.
pub struct Utilities {
    pub lookups: LookupService,
    pub media: MediaService,
    pub history: HistoryService,
}
