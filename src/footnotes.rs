//! Footnotes shown under the detention charts.
//!
//! Text is taken verbatim from TRAC's "ICE Detainees" page. Its third
//! footnote is not used anywhere on that page, so it is not carried here.

use crate::domain::Dataset;

pub fn abbreviations_text() -> &'static str {
    "\"ICE\" stands for \"Immigration and Customs Enforcement\". \"CBP\" stands for \"Customs and Border Protection\"."
}

pub fn date_footnote_text() -> &'static str {
    "* Dates before 11/15/2021 refer to the date ICE posted the data; \
     dates after 11/15/2021 refer to the date the information was current as of."
}

pub fn criminality_footnote_text() -> &'static str {
    "** ICE classifies an individual as a convicted criminal if they have been convicted \
     of any criminal violation. Violations can range from serious felonies all the way down \
     to a purely immigration violation (such as illegal entry which is a petty offense under \
     the U.S. Code), or a violation which results in only in a fine such as not keeping a dog \
     on a leash, fishing without a permit, driving a vehicle with a tail light out, etc. For \
     historical series on ICE detainees identifying the most serious offense they have been \
     convicted of along with other details such as when they entered the U.S., nationality, \
     gender, etc. go to https://tracreports.org/phptools/immigration/detention/"
}

/// Footnote block for a dataset, one paragraph per line.
pub fn footnote(dataset: Dataset) -> String {
    match dataset {
        Dataset::ArrestingAuthority => [abbreviations_text(), date_footnote_text()].join("\n"),
        Dataset::Criminality => [
            abbreviations_text(),
            date_footnote_text(),
            criminality_footnote_text(),
        ]
        .join("\n"),
        Dataset::BorderPatrol => String::new(),
    }
}
