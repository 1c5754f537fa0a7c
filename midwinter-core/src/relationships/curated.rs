//! Hand-authored relationship table for the Midwinter cast.
//!
//! Read from the character biographies in the manual. Used when the
//! reference database ships without its own relationship table.

use super::{Relationship, Sentiment};
use Sentiment::{Negative, Positive};

const CURATED: &[(&str, &str, &str, Sentiment)] = &[
    // Captain John Stark
    ("Captain John Stark", "Lieutenant Howard Courtenay", "friend", Positive),
    ("Captain John Stark", "Karl Rudzinski", "friend", Positive),
    ("Captain John Stark", "Nurse Sarah Maddocks", "lover", Positive),

    // Constable Harvey Pringle
    ("Constable Harvey Pringle", "Constable Gordon Macleod", "regards_as_friend", Positive),
    ("Constable Harvey Pringle", "Constable Fergus Flynn", "regards_as_friend", Positive),
    ("Constable Harvey Pringle", "Jean-Luc Chabrun", "blames", Negative),

    // Constable Gordon Macleod
    ("Constable Gordon Macleod", "Franco Grazzini", "dislikes", Negative),
    ("Franco Grazzini", "Constable Gordon Macleod", "dislikes", Negative),
    ("Sergeant George Tasker", "Constable Gordon Macleod", "respects", Positive),
    ("Captain John Stark", "Constable Gordon Macleod", "respects", Positive),

    // Karl Rudzinski
    ("Karl Rudzinski", "Virginia Caygill", "engaged", Positive),
    ("Karl Rudzinski", "Jeremiah Gunn", "dislikes", Negative),
    ("Karl Rudzinski", "Franco Grazzini", "dislikes", Negative),
    ("Karl Rudzinski", "Captain John Stark", "mentor", Positive),

    // Franco Grazzini
    ("Franco Grazzini", "Virginia Caygill", "in_love", Positive),
    ("Franco Grazzini", "Karl Rudzinski", "hates", Negative),
    ("Franco Grazzini", "Nurse Sarah Maddocks", "admires", Positive),

    // Jean-Luc Chabrun
    ("Jean-Luc Chabrun", "Constable Fergus Flynn", "friend", Positive),
    ("Jean-Luc Chabrun", "Constable Gordon Macleod", "friend", Positive),
    ("Sergeant Victor Grice", "Jean-Luc Chabrun", "hates", Negative),
    ("Constable Harvey Pringle", "Jean-Luc Chabrun", "hates", Negative),
    ("Constable Bill Doughty", "Jean-Luc Chabrun", "hates", Negative),

    // Sergeant George Tasker
    ("Sergeant George Tasker", "Doctor Pierre Revel", "unforgiven", Negative),
    ("Sergeant George Tasker", "Jeremiah Gunn", "disapproves", Negative),
    ("Sergeant George Tasker", "Lieutenant Charles Ambler", "disapproves", Negative),

    // Sergeant Tom Llewellyn
    ("Lieutenant Barnaby Gaunt", "Sergeant Tom Llewellyn", "dislikes", Negative),
    ("Gregory Flint", "Sergeant Tom Llewellyn", "grudge", Negative),

    // Sergeant Victor Grice
    ("Sergeant Victor Grice", "Captain John Stark", "resents", Negative),
    ("Sergeant Victor Grice", "Lieutenant Barnaby Gaunt", "resents", Negative),
    ("Sergeant Victor Grice", "Lieutenant Howard Courtenay", "respects", Positive),

    // Doctor Pierre Revel
    ("Doctor Pierre Revel", "Lieutenant Howard Courtenay", "friend", Positive),

    // Konrad Rudel
    ("Konrad Rudel", "Davy Hart", "friend", Positive),

    // Virginia Caygill
    ("Virginia Caygill", "Karl Rudzinski", "engaged", Positive),
    ("Virginia Caygill", "Doctor Pierre Revel", "despises", Negative),
    ("Virginia Caygill", "Davy Hart", "teacher", Positive),
    ("Virginia Caygill", "Jenny Adams", "teacher", Positive),

    // Professor Olaf Kristiansen
    ("Professor Olaf Kristiansen", "Captain John Stark", "dislikes", Negative),
    ("Professor Olaf Kristiansen", "Lieutenant Howard Courtenay", "dislikes", Negative),
    ("Professor Olaf Kristiansen", "Gregory Flint", "friend", Positive),
    ("Professor Olaf Kristiansen", "Davy Hart", "grandparent", Positive),

    // Jeremiah Gunn
    ("Jeremiah Gunn", "Franco Grazzini", "friend", Positive),
    ("Jeremiah Gunn", "Nurse Sarah Maddocks", "friend", Positive),

    // Constable Federico Garcia
    ("Constable Federico Garcia", "Constable Kurt Muller", "friend", Positive),

    // Constable Homer Wright
    ("Constable Homer Wright", "Constable Kurt Muller", "friend", Positive),
    ("Constable Homer Wright", "Constable Oliver Jessop", "friend", Positive),
    ("Constable Homer Wright", "Constable Shigeru Iwamoto", "friend", Positive),
    ("Constable Luke Jackson", "Constable Homer Wright", "loathes", Negative),

    // Constable Shigeru Iwamoto
    ("Constable Shigeru Iwamoto", "Constable Homer Wright", "friend", Positive),

    // Constable Bill Doughty
    ("Constable Bill Doughty", "Constable Kurt Muller", "friend", Positive),
    ("Constable Bill Doughty", "Constable Federico Garcia", "friend", Positive),
    ("Lieutenant Howard Courtenay", "Constable Bill Doughty", "dislikes", Negative),

    // Lieutenant Howard Courtenay
    ("Lieutenant Howard Courtenay", "Captain John Stark", "friend", Positive),
    ("Lieutenant Howard Courtenay", "Virginia Caygill", "family", Positive),
    ("Lieutenant Howard Courtenay", "Doctor Pierre Revel", "friend", Positive),

    // Davy Hart
    ("Davy Hart", "Professor Olaf Kristiansen", "grandchild", Positive),
    ("Davy Hart", "Konrad Rudel", "hero", Positive),
    ("Davy Hart", "Jenny Adams", "boyfriend", Positive),
    ("Davy Hart", "Virginia Caygill", "crush", Positive),

    // Jenny Adams
    ("Jenny Adams", "Nurse Sarah Maddocks", "admires", Positive),
    ("Jenny Adams", "Davy Hart", "boyfriend", Positive),

    // Constable Bob Hammond
    ("Constable Bob Hammond", "Constable Harry Cropper", "friend", Positive),

    // Constable Oliver Jessop
    ("Constable Oliver Jessop", "Constable Fergus Flynn", "dislikes", Negative),
    ("Constable Oliver Jessop", "Constable Gordon Macleod", "dislikes", Negative),
    ("Constable Oliver Jessop", "Constable Homer Wright", "friend", Positive),
    ("Constable Oliver Jessop", "Constable Shigeru Iwamoto", "friend", Positive),

    // Lieutenant Barnaby Gaunt
    ("Lieutenant Barnaby Gaunt", "Captain John Stark", "respects", Positive),
    ("Lieutenant Barnaby Gaunt", "Sergeant George Tasker", "respects", Positive),
    ("Lieutenant Barnaby Gaunt", "Sergeant Tom Llewellyn", "scornful", Negative),
    ("Lieutenant Barnaby Gaunt", "Lieutenant Charles Ambler", "scornful", Negative),
    ("Lieutenant Barnaby Gaunt", "Constable Fergus Flynn", "scornful", Negative),
    ("Lieutenant Barnaby Gaunt", "Constable Harry Cropper", "scornful", Negative),

    // Nurse Sarah Maddocks
    ("Nurse Sarah Maddocks", "Captain John Stark", "lover", Positive),
    ("Nurse Sarah Maddocks", "Franco Grazzini", "fond", Positive),
    ("Nurse Sarah Maddocks", "Doctor Pierre Revel", "dislikes", Negative),

    // Constable Kurt Muller
    ("Constable Kurt Muller", "Constable Federico Garcia", "friend", Positive),
    ("Constable Kurt Muller", "Constable Bill Doughty", "friend", Positive),
    ("Constable Kurt Muller", "Constable Homer Wright", "friend", Positive),
    ("Constable Kurt Muller", "Constable Shigeru Iwamoto", "dislikes", Negative),

    // Constable Luke Jackson
    ("Constable Luke Jackson", "Captain John Stark", "hates", Negative),
    ("Constable Luke Jackson", "Constable Federico Garcia", "friend", Positive),
    ("Constable Luke Jackson", "Gregory Flint", "friend", Positive),

    // Gregory Flint
    ("Gregory Flint", "Captain John Stark", "blames", Negative),
    ("Gregory Flint", "Lieutenant Barnaby Gaunt", "blames", Negative),
    ("Gregory Flint", "Sergeant Tom Llewellyn", "blames", Negative),
    ("Gregory Flint", "Professor Olaf Kristiansen", "friend", Positive),
    ("Gregory Flint", "Constable Luke Jackson", "friend", Positive),
    ("Gregory Flint", "Constable Fergus Flynn", "friend", Positive),

    // Lieutenant Charles Ambler
    ("Lieutenant Charles Ambler", "Karl Rudzinski", "friend", Positive),
    ("Lieutenant Charles Ambler", "Constable Harry Cropper", "friend", Positive),
    ("Lieutenant Charles Ambler", "Lieutenant Barnaby Gaunt", "dislikes", Negative),
];

/// The curated edges, in authored order.
pub fn curated_relationships() -> Vec<Relationship> {
    CURATED
        .iter()
        .map(|&(from, to, kind, sentiment)| Relationship::new(from, to, kind, sentiment))
        .collect()
}
