//! Extraction of tabular records from the service's SOAP/diffgram
//! responses.
//!
//! The payload of interest sits deep inside the envelope:
//! `RunQueryResult > diffgr:diffgram > NewDataSet > Table*`, where each
//! `Table` element holds one horizon row and each of its child elements
//! is one column. Column sets vary row to row (absent columns are simply
//! omitted), so rows are decoded into raw name/value maps.

use anyhow::{anyhow, Result};
use pedon_schemas::horizon::RawRecord;
use quick_xml::events::Event;
use quick_xml::Reader;

/// Parses every `Table` row out of a query response.
///
/// A response without a `NewDataSet` element is malformed and errors; a
/// present-but-empty `NewDataSet` yields an empty record list.
pub fn parse_horizon_table(xml: &str) -> Result<Vec<RawRecord>> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut buf = Vec::new();
    let mut records = Vec::new();
    let mut saw_dataset = false;
    let mut current: Option<RawRecord> = None;
    let mut column: Option<String> = None;
    let mut value = String::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let name = local_name(e.local_name().as_ref());
                if name == "NewDataSet" {
                    saw_dataset = true;
                } else if saw_dataset && current.is_none() && name == "Table" {
                    current = Some(RawRecord::new());
                } else if current.is_some() {
                    column = Some(name);
                    value.clear();
                }
            }
            Ok(Event::Empty(e)) => {
                let name = local_name(e.local_name().as_ref());
                if saw_dataset && current.is_none() && name == "Table" {
                    records.push(RawRecord::new());
                }
                // An empty column element carries no value; leave it absent.
            }
            Ok(Event::Text(t)) if column.is_some() => {
                value.push_str(&t.unescape()?);
            }
            Ok(Event::End(e)) => {
                let name = local_name(e.local_name().as_ref());
                if name == "Table" {
                    if let Some(record) = current.take() {
                        records.push(record);
                    }
                } else if let (Some(col), Some(record)) = (column.take(), current.as_mut()) {
                    record.insert(col, std::mem::take(&mut value));
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(anyhow!(
                    "XML parsing error at position {}: {:?}",
                    reader.buffer_position(),
                    e
                ))
            }
            _ => {}
        }
        buf.clear();
    }

    if !saw_dataset {
        return Err(anyhow!(
            "query response did not contain a NewDataSet payload"
        ));
    }
    Ok(records)
}

fn local_name(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
<soap:Envelope xmlns:soap="http://www.w3.org/2003/05/soap-envelope">
  <soap:Body>
    <RunQueryResponse>
      <RunQueryResult>
        <diffgr:diffgram xmlns:diffgr="urn:schemas-microsoft-com:xml-diffgram-v1" xmlns:msdata="urn:schemas-microsoft-com:xml-msdata">
          <NewDataSet>
            <Table diffgr:id="Table1" msdata:rowOrder="0">
              <cokey>25621021</cokey>
              <chkey>76544234</chkey>
              <prcent>85</prcent>
              <hzname>Ap</hzname>
              <deptht>0</deptht>
              <depthb>23</depthb>
              <sand>40.2</sand>
              <silt>30.5</silt>
              <clay>29.3</clay>
              <ec/>
            </Table>
            <Table diffgr:id="Table2" msdata:rowOrder="1">
              <cokey>25621021</cokey>
              <chkey>76544235</chkey>
              <prcent>85</prcent>
              <hzname>Bt1</hzname>
              <deptht>23</deptht>
              <depthb>61</depthb>
              <sand>35.1</sand>
              <silt>31.4</silt>
              <clay>33.5</clay>
            </Table>
          </NewDataSet>
        </diffgr:diffgram>
      </RunQueryResult>
    </RunQueryResponse>
  </soap:Body>
</soap:Envelope>
"#;

    #[test]
    fn parses_table_rows_into_column_maps() {
        let records = parse_horizon_table(SAMPLE).unwrap();
        assert_eq!(records.len(), 2);

        assert_eq!(records[0].get("hzname").map(String::as_str), Some("Ap"));
        assert_eq!(records[0].get("deptht").map(String::as_str), Some("0"));
        assert_eq!(records[0].get("sand").map(String::as_str), Some("40.2"));
        // The self-closing <ec/> element contributes no value.
        assert_eq!(records[0].get("ec"), None);

        assert_eq!(records[1].get("hzname").map(String::as_str), Some("Bt1"));
        assert_eq!(records[1].get("depthb").map(String::as_str), Some("61"));
    }

    #[test]
    fn empty_dataset_yields_no_records() {
        let xml = "<Envelope><Body><NewDataSet></NewDataSet></Body></Envelope>";
        assert!(parse_horizon_table(xml).unwrap().is_empty());
    }

    #[test]
    fn response_without_dataset_is_malformed() {
        let xml = "<html><body>Service Unavailable</body></html>";
        assert!(parse_horizon_table(xml).is_err());
    }
}
