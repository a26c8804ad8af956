use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "campus")]
#[command(about = "University ERP admin CLI", long_about = None)]
pub struct Cli {
    #[arg(
        short,
        long,
        help = "Path to the configuration file",
        default_value = "data/config.toml"
    )]
    pub config: String,

    #[arg(long, help = "Bearer token override (skips the credentials file)")]
    pub token: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Academic management: courses, syllabi, enrollments, timetables, calendar
    Academics {
        #[command(subcommand)]
        command: AcademicsCommands,
    },
    /// Examination administration: sessions, schedules, rooms, tickets, results
    Exams {
        #[command(subcommand)]
        command: ExamsCommands,
    },
    /// Student records: profiles, batches, documents, bulk import
    Students {
        #[command(subcommand)]
        command: StudentsCommands,
    },
}

/// Shared list controls, mapped onto DRF query parameters.
#[derive(Args, Clone, Default)]
pub struct ListArgs {
    #[arg(long, help = "Free-text search term")]
    pub search: Option<String>,

    #[arg(long, help = "Sort field, prefixed with '-' for descending")]
    pub ordering: Option<String>,

    #[arg(long, help = "Page number", default_value_t = 1)]
    pub page: u32,

    #[arg(long, help = "Records per page (defaults to the configured page size)")]
    pub page_size: Option<u32>,

    #[arg(long, help = "Exact-match filters as field=value pairs", value_parser = parse_filter)]
    pub filter: Vec<(String, String)>,
}

pub fn parse_filter(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((field, value)) if !field.is_empty() => Ok((field.to_string(), value.to_string())),
        _ => Err(format!("expected field=value, got '{raw}'")),
    }
}

#[derive(Subcommand)]
pub enum AcademicsCommands {
    /// List courses
    Courses {
        #[command(flatten)]
        list: ListArgs,
    },
    /// Show one course
    Course {
        id: String,
    },
    /// Create a course
    CreateCourse {
        #[arg(long)]
        code: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        credits: u32,
        #[arg(long, help = "Department id")]
        department: String,
        #[arg(long, default_value = "ACTIVE")]
        status: String,
    },
    /// Update course fields from a JSON object
    UpdateCourse {
        id: String,
        #[arg(long, help = "JSON object of fields to change")]
        data: String,
    },
    /// Delete a course
    DeleteCourse {
        id: String,
        #[arg(long, help = "Skip the confirmation prompt")]
        yes: bool,
    },
    /// List syllabi
    Syllabi {
        #[command(flatten)]
        list: ListArgs,
    },
    /// Approve a syllabus
    ApproveSyllabus {
        id: String,
    },
    /// List enrollments
    Enrollments {
        #[command(flatten)]
        list: ListArgs,
    },
    /// List timetable slots
    Timetables {
        #[command(flatten)]
        list: ListArgs,
    },
    /// List academic calendar events
    Calendar {
        #[command(flatten)]
        list: ListArgs,
    },
    /// Create a calendar event
    CreateEvent {
        #[arg(long)]
        title: String,
        #[arg(long)]
        event_type: String,
        #[arg(long, help = "YYYY-MM-DD")]
        start_date: String,
        #[arg(long, help = "YYYY-MM-DD")]
        end_date: String,
        #[arg(long, default_value_t = false)]
        holiday: bool,
    },
    /// Enroll students into a batch enrollment
    EnrollStudents {
        id: String,
        #[arg(long, required = true, num_args = 1.., help = "Student ids")]
        students: Vec<String>,
    },
}

#[derive(Subcommand)]
pub enum ExamsCommands {
    /// Exams dashboard statistics
    Dashboard,
    /// List exam sessions
    Sessions {
        #[command(flatten)]
        list: ListArgs,
    },
    /// Create an exam session
    CreateSession {
        #[arg(long)]
        name: String,
        #[arg(long)]
        academic_year: String,
        #[arg(long, help = "YYYY-MM-DD")]
        start_date: String,
        #[arg(long, help = "YYYY-MM-DD")]
        end_date: String,
    },
    /// List exam schedules
    Schedules {
        #[command(flatten)]
        list: ListArgs,
    },
    /// Start an exam
    StartExam {
        id: String,
    },
    /// End an exam
    EndExam {
        id: String,
    },
    /// List exam rooms
    Rooms {
        #[command(flatten)]
        list: ListArgs,
    },
    /// Create an exam room
    CreateRoom {
        #[arg(long)]
        room_number: String,
        #[arg(long)]
        building: String,
        #[arg(long)]
        capacity: u32,
    },
    /// List registrations awaiting approval
    PendingRegistrations {
        #[command(flatten)]
        list: ListArgs,
    },
    /// Approve an exam registration
    Approve {
        id: String,
    },
    /// Reject an exam registration
    Reject {
        id: String,
        #[arg(long)]
        reason: String,
    },
    /// Issue a hall ticket
    IssueTicket {
        id: String,
    },
    /// Download a hall ticket PDF
    DownloadTicket {
        id: String,
        #[arg(long, help = "Output file path", default_value = "hall-ticket.pdf")]
        out: String,
    },
    /// Publish an exam result
    PublishResult {
        id: String,
    },
    /// Record a due payment
    UpdatePayment {
        id: String,
        #[arg(long)]
        amount: f64,
    },
}

#[derive(Subcommand)]
pub enum StudentsCommands {
    /// List students
    List {
        #[command(flatten)]
        list: ListArgs,
    },
    /// Show one student
    Get {
        id: String,
    },
    /// Create a student record
    Create {
        #[arg(long)]
        roll_number: String,
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long)]
        email: String,
        #[arg(long, help = "Department id")]
        department: Option<String>,
    },
    /// Delete a student record
    Delete {
        id: String,
        #[arg(long, help = "Skip the confirmation prompt")]
        yes: bool,
    },
    /// Resolve student batches (probes known endpoints)
    Batches {
        #[command(flatten)]
        list: ListArgs,
    },
    /// Student statistics
    Stats,
    /// List a student's documents
    Documents {
        #[arg(long, help = "Student id")]
        student: String,
    },
    /// Bulk-create students from a JSON file
    BulkImport {
        #[arg(long, help = "Path to a JSON array of student records")]
        file: String,
    },
}
