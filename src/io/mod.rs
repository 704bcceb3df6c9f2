/// CSV export of run series.
pub mod export;
