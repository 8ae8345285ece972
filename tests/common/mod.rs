#![allow(dead_code)]

pub mod cli;

pub const CONTAINER_JSON: &str = r#"{
  "exportFormatVersion": 2,
  "exportTime": "2024-05-01 10:00:00",
  "containerVersion": {
    "accountId": "111",
    "containerId": "222",
    "containerVersionId": "3",
    "container": {"name": "Acme Lofts"},
    "tag": [
      {"tagId": "10", "name": "GA4 Config", "type": "gaawc", "parentFolderId": "1",
       "parameter": [{"type": "template", "key": "measurementId", "value": "{{GA4 Measurement ID}}"}]},
      {"tagId": "11", "name": "CallRail Swap", "type": "html", "paused": true,
       "parameter": [{"type": "template", "key": "html", "value": "<script src='//cdn.callrail.com/old.js'></script>"}]}
    ],
    "trigger": [{"triggerId": "20", "name": "All Pages", "type": "pageview"}],
    "folder": [{"folderId": "1", "name": "Analytics"}],
    "variable": [
      {"variableId": "30", "name": "GA4 Measurement ID", "type": "c",
       "parameter": [{"type": "template", "key": "value", "value": "G-OLD"}]}
    ],
    "builtInVariable": [{"name": "Page URL", "type": "PAGE_URL"}]
  }
}"#;

pub const SHEET_JSON: &str = r#"{
  "range": "'Tracker Sheet'!A1:D2",
  "values": [
    ["Property Name", "Website URL", "GA4 Measurement ID", "CallRail Tag"],
    ["Acme Lofts", "https://www.acme.test/", "G-NEW", "<script src='//cdn.callrail.com/new.js'></script>"]
  ]
}"#;
