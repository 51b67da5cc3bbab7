mod analysis;
mod clock;
mod feed;

pub use analysis::IAnalysisClient;
pub use clock::{IClock, SystemClock};
pub use feed::IFeedClient;
