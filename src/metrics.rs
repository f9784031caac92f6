use crate::format::{format_bytes, format_ms, format_number, format_seconds};
use crate::model::{ColdStat, FormatReport, FormatSummary, MetricDescriptor, QueryTiming};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Metric {
    CompressionRatio,
    OutputSize,
    WriteTime,
    CompressionSpeed,
    DecompressionTime,
    DecompressionSpeed,
    FullScan,
    Selective,
    RandomAccess,
    ColdFullScan,
    ColdSelective,
    ColdRandomAccess,
}

impl Metric {
    pub const ALL: [Metric; 12] = [
        Metric::CompressionRatio,
        Metric::OutputSize,
        Metric::WriteTime,
        Metric::CompressionSpeed,
        Metric::DecompressionTime,
        Metric::DecompressionSpeed,
        Metric::FullScan,
        Metric::Selective,
        Metric::RandomAccess,
        Metric::ColdFullScan,
        Metric::ColdSelective,
        Metric::ColdRandomAccess,
    ];

    /// Metrics offered on the overview and dataset line charts.
    pub const CHARTED: [Metric; 6] = [
        Metric::CompressionRatio,
        Metric::OutputSize,
        Metric::WriteTime,
        Metric::FullScan,
        Metric::Selective,
        Metric::RandomAccess,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Self::CompressionRatio => "compression_ratio",
            Self::OutputSize => "output_size",
            Self::WriteTime => "write_time",
            Self::CompressionSpeed => "compression_speed",
            Self::DecompressionTime => "decompression_time",
            Self::DecompressionSpeed => "decompression_speed",
            Self::FullScan => "full_scan",
            Self::Selective => "selective",
            Self::RandomAccess => "random_access",
            Self::ColdFullScan => "cold_full_scan",
            Self::ColdSelective => "cold_selective",
            Self::ColdRandomAccess => "cold_random_access",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::CompressionRatio => "Compression ratio",
            Self::OutputSize => "Compressed size",
            Self::WriteTime => "Compression time",
            Self::CompressionSpeed => "Compression speed",
            Self::DecompressionTime => "Decompression time",
            Self::DecompressionSpeed => "Decompression speed",
            Self::FullScan => "Full scan median",
            Self::Selective => "Selective predicate median",
            Self::RandomAccess => "Random access median",
            Self::ColdFullScan => "Cold full scan",
            Self::ColdSelective => "Cold selective predicate",
            Self::ColdRandomAccess => "Cold random access",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            Self::CompressionRatio => "ratio",
            Self::OutputSize => "bytes",
            Self::WriteTime | Self::DecompressionTime => "s",
            Self::CompressionSpeed | Self::DecompressionSpeed => "MB/s",
            _ => "ms",
        }
    }

    pub fn prefers_higher(self) -> bool {
        matches!(
            self,
            Self::CompressionRatio | Self::CompressionSpeed | Self::DecompressionSpeed
        )
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|metric| metric.key() == key)
    }

    pub fn descriptor(self) -> MetricDescriptor {
        MetricDescriptor {
            key: self.key().to_string(),
            label: self.label().to_string(),
            unit: self.unit().to_string(),
        }
    }

    pub fn extract(self, report: &FormatReport) -> Option<f64> {
        let write = report.write.as_ref();
        let queries = &report.queries;
        let median = |timing: &Option<QueryTiming>| timing.as_ref().and_then(|t| t.median_ms);
        let cold = |timing: &Option<QueryTiming>| timing.as_ref().and_then(|t| t.cold_ms);

        match self {
            Self::CompressionRatio => report.compression_ratio,
            Self::OutputSize => write.and_then(|w| w.output_size_bytes),
            Self::WriteTime => write.and_then(|w| w.compression_time_s),
            Self::CompressionSpeed => write.and_then(|w| w.compression_speed_mb_s),
            Self::DecompressionTime => write.and_then(|w| w.decompression_time_s),
            Self::DecompressionSpeed => write.and_then(|w| w.decompression_speed_mb_s),
            Self::FullScan => median(&queries.full_scan_min),
            Self::Selective => median(&queries.selective_predicate),
            Self::RandomAccess => median(&queries.random_access),
            Self::ColdFullScan => cold(&queries.full_scan_min),
            Self::ColdSelective => cold(&queries.selective_predicate),
            Self::ColdRandomAccess => cold(&queries.random_access),
        }
    }

    /// Cross-dataset geomean of this metric from an overall summary.
    pub fn summary_geomean(self, summary: &FormatSummary) -> Option<f64> {
        let queries = &summary.query_median_ms_geomean;
        let cold = &summary.cold_query_ms_stats;
        let cold_geomean = |stat: &Option<ColdStat>| stat.as_ref().and_then(|s| s.geomean);

        match self {
            Self::CompressionRatio => summary.compression_ratio_geomean,
            Self::OutputSize => summary.output_size_bytes_geomean,
            Self::WriteTime => summary.compression_time_s_geomean,
            Self::CompressionSpeed => summary.compression_speed_mb_s_geomean,
            Self::DecompressionTime => summary.decompression_time_s_geomean,
            Self::DecompressionSpeed => summary.decompression_speed_mb_s_geomean,
            Self::FullScan => queries.full_scan_min,
            Self::Selective => queries.selective_predicate,
            Self::RandomAccess => queries.random_access,
            Self::ColdFullScan => cold_geomean(&cold.full_scan_min),
            Self::ColdSelective => cold_geomean(&cold.selective_predicate),
            Self::ColdRandomAccess => cold_geomean(&cold.random_access),
        }
    }

    pub fn format_value(self, value: f64) -> String {
        match self {
            Self::CompressionRatio => format_number(Some(value), 2),
            Self::OutputSize => format_bytes(Some(value)),
            Self::WriteTime | Self::DecompressionTime => format_seconds(Some(value)),
            Self::CompressionSpeed | Self::DecompressionSpeed => {
                format!("{} MB/s", format_number(Some(value), 2))
            }
            _ => format_ms(Some(value)),
        }
    }
}
