/// Static description of a local tree
#[derive(Debug, Copy, Clone)]
pub enum Entry {
    Dir {
        /// Name of the directory
        name: &'static str,
        /// Entries of the directory, in listing order
        entries: &'static [Entry],
    },
    File {
        /// Name of the file
        name: &'static str,
        /// Size of the file in bytes
        size: u64,
    },
}

pub const KIB: u64 = 1024;
pub const MIB: u64 = 1024 * KIB;

#[rustfmt::skip]
pub const COURSE: &[Entry] = &[
    Entry::File{name: "syllabus.pdf", size: 120 * KIB},
    Entry::Dir{name: "Week1", entries: &[
        Entry::File{name: "lecture.pptx", size: 2 * MIB},
        Entry::File{name: "notes.txt", size: 3 * KIB},
        Entry::Dir{name: "Solutions", entries: &[
            Entry::File{name: "answers.pdf", size: 10 * KIB},
        ]},
        Entry::File{name: "after-solutions.txt", size: KIB},
    ]},
    Entry::Dir{name: "Week2", entries: &[
        Entry::File{name: "assignment.docx", size: 40 * KIB},
        Entry::File{name: "recording.mp4", size: 6 * MIB},
        Entry::Dir{name: "data", entries: &[
            Entry::File{name: "grades.xlsx", size: 12 * KIB},
        ]},
    ]},
];
