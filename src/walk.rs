//! Walking several sorted record streams together.

use crate::error::Result;
use crate::record::{GenomicKey, Record};

/// Items a [`WalkTogether`] source may yield: plain records, or the
/// `Result<Record>`s produced by [`AavfRecords`](crate::AavfRecords).
pub trait IntoRecord {
    fn into_record(self) -> Result<Record>;
}

impl IntoRecord for Record {
    fn into_record(self) -> Result<Record> {
        Ok(self)
    }
}

impl IntoRecord for Result<Record> {
    fn into_record(self) -> Result<Record> {
        self
    }
}

/// Iterator returned by [`walk_together`].
pub struct WalkTogether<I: Iterator> {
    sources: Vec<I>,
    /// Next record of each source; `None` once that source is exhausted.
    pending: Vec<Option<Record>>,
    /// Sources whose pending record was emitted and must be pulled again.
    stale: Vec<usize>,
    last_chrom: Option<String>,
    failed: bool,
}

/// Walks sources sorted by `(chrom, gene, pos)` in step.
///
/// Each row has one slot per source, holding that source's record at the
/// current key or `None`. All keys of the chromosome emitted last are drained
/// before moving on to another chromosome. Unsorted input gives undefined
/// alignment.
///
/// # Examples
///
/// ```
/// use aavf::{walk_together, Record};
///
/// let a = vec![Record::new("chr1", "g", 5, "K", &["N"]), Record::new("chr2", "g", 1, "K", &["N"])];
/// let b = vec![Record::new("chr1", "g", 9, "K", &["N"])];
/// let rows: Vec<_> = walk_together(vec![a.into_iter(), b.into_iter()])
///     .collect::<Result<_, _>>()
///     .unwrap();
/// let shape: Vec<_> = rows
///     .iter()
///     .map(|row| row.iter().map(Option::is_some).collect::<Vec<_>>())
///     .collect();
/// assert_eq!(shape, vec![vec![true, false], vec![false, true], vec![true, false]]);
/// ```
pub fn walk_together<I>(sources: Vec<I>) -> WalkTogether<I>
where
    I: Iterator,
    I::Item: IntoRecord,
{
    WalkTogether::new(sources)
}

impl<I> WalkTogether<I>
where
    I: Iterator,
    I::Item: IntoRecord,
{
    pub fn new(sources: Vec<I>) -> Self {
        let pending = vec![None; sources.len()];
        let stale = (0..sources.len()).collect();
        WalkTogether {
            sources,
            pending,
            stale,
            last_chrom: None,
            failed: false,
        }
    }

    fn advance(&mut self, i: usize) -> Result<()> {
        self.pending[i] = match self.sources[i].next() {
            Some(item) => Some(item.into_record()?),
            None => None,
        };
        Ok(())
    }

    fn step(&mut self) -> Result<Option<Vec<Option<Record>>>> {
        for i in std::mem::take(&mut self.stale) {
            self.advance(i)?;
        }

        let keys = self.pending.iter().flatten().map(Record::key);
        let min_key = match &self.last_chrom {
            Some(chrom) => keys
                .clone()
                .filter(|k| k.chrom == chrom.as_str())
                .min()
                .or_else(|| keys.min()),
            None => keys.min(),
        };
        let (chrom, gene, pos) = match min_key {
            Some(key) => (key.chrom.to_owned(), key.gene.to_owned(), key.pos),
            None => return Ok(None),
        };
        let min_key = GenomicKey {
            chrom: &chrom,
            gene: &gene,
            pos,
        };

        let matching: Vec<usize> = self
            .pending
            .iter()
            .enumerate()
            .filter_map(|(i, r)| match r {
                Some(r) if r.key() == min_key => Some(i),
                _ => None,
            })
            .collect();

        let mut row = vec![None; self.pending.len()];
        for &i in &matching {
            row[i] = self.pending[i].take();
        }
        self.last_chrom = Some(chrom);
        self.stale = matching;
        Ok(Some(row))
    }
}

impl<I> Iterator for WalkTogether<I>
where
    I: Iterator,
    I::Item: IntoRecord,
{
    type Item = Result<Vec<Option<Record>>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.step() {
            Ok(row) => row.map(Ok),
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AavfError;
    use pretty_assertions::assert_eq;

    fn rec(chrom: &str, pos: u64) -> Record {
        Record::new(chrom, "RT", pos, "K", &["N"])
    }

    fn positions(rows: &[Vec<Option<Record>>]) -> Vec<Vec<Option<(String, u64)>>> {
        rows.iter()
            .map(|row| {
                row.iter()
                    .map(|r| r.as_ref().map(|r| (r.chrom().clone(), r.pos())))
                    .collect()
            })
            .collect()
    }

    fn walk(sources: Vec<Vec<Record>>) -> Vec<Vec<Option<Record>>> {
        walk_together(sources.into_iter().map(Vec::into_iter).collect())
            .collect::<Result<_>>()
            .unwrap()
    }

    #[test]
    fn test_identical_sources() {
        let source: Vec<Record> = (1..=7).map(|p| rec("hxb2_pol", p)).collect();
        let rows = walk(vec![source.clone(), source.clone(), source]);
        assert_eq!(rows.len(), 7);
        for row in &rows {
            assert_eq!(row.len(), 3);
            assert!(row.iter().all(Option::is_some));
            assert_eq!(row[0], row[1]);
            assert_eq!(row[1], row[2]);
        }
    }

    #[test]
    fn test_contig_completes_first() {
        let rows = walk(vec![
            vec![rec("chr1", 5), rec("chr2", 1)],
            vec![rec("chr1", 9)],
        ]);
        assert_eq!(
            positions(&rows),
            vec![
                vec![Some(("chr1".into(), 5)), None],
                vec![None, Some(("chr1".into(), 9))],
                vec![Some(("chr2".into(), 1)), None],
            ]
        );
    }

    #[test]
    fn test_contig_completion_beats_key_order() {
        // "chr1" < "chr2" but chr2 keys are drained before returning to chr1
        let rows = walk(vec![
            vec![rec("chr2", 1), rec("chr2", 3)],
            vec![rec("chr1", 1)],
        ]);
        assert_eq!(
            positions(&rows),
            vec![
                vec![None, Some(("chr1".into(), 1))],
                vec![Some(("chr2".into(), 1)), None],
                vec![Some(("chr2".into(), 3)), None],
            ]
        );
    }

    #[test]
    fn test_one_row_per_distinct_key() {
        let rows = walk(vec![
            vec![rec("c", 1), rec("c", 2), rec("c", 4)],
            vec![rec("c", 2), rec("c", 3)],
            vec![],
            vec![rec("c", 1), rec("c", 4), rec("c", 5)],
        ]);
        assert_eq!(rows.len(), 5);
        let counts: Vec<usize> = rows
            .iter()
            .map(|row| row.iter().filter(|r| r.is_some()).count())
            .collect();
        assert_eq!(counts, vec![2, 2, 1, 2, 1]);
        assert!(rows.iter().all(|row| row[2].is_none()));
    }

    #[test]
    fn test_empty_sources() {
        assert!(walk(vec![]).is_empty());
        assert!(walk(vec![vec![], vec![]]).is_empty());
    }

    #[test]
    fn test_error_stops_walk() {
        let failing: Vec<Result<Record>> = vec![
            Ok(rec("c", 1)),
            Err(AavfError::data_row("bad", "expected 9 columns, found 1")),
            Ok(rec("c", 3)),
        ];
        let mut walker = walk_together(vec![failing.into_iter()]);
        let first = walker.next().unwrap().unwrap();
        assert_eq!(first[0].as_ref().map(Record::pos), Some(1));
        assert!(walker.next().unwrap().is_err());
        assert!(walker.next().is_none());
    }
}
