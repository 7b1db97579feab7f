//! Captured `xdslctl` output of a VDSL2 17a line, shortened to the tones the tests look at.

pub(crate) const STATS: &str = "xdslctl: ADSL driver and PHY status
Status: Showtime
Last Retrain Reason:\t0
Last initialization procedure status:\t0
Max:\tUpstream rate = 46634 Kbps, Downstream rate = 116912 Kbps
Bearer:\t0, Upstream rate = 40000 Kbps, Downstream rate = 100000 Kbps
Bearer:\t1, Upstream rate = 0 Kbps, Downstream rate = 0 Kbps

Link Power State:\tL0
Mode:\t\t\tVDSL2 Annex B
VDSL2 Profile:\t\tProfile 17a
TPS-TC:\t\t\tPTM Mode(0x0)
Trellis:\t\tU:ON /D:ON
Line Status:\t\tNo Defect
Training Status:\tShowtime
\t\tDown\t\tUp
SNR (dB):\t 7.7\t\t 11.3
Attn(dB):\t 13.4\t\t 0.0
Pwr(dBm):\t 14.4\t\t 7.1

\t\t\tVDSL2 framing
\t\t\tBearer 0
MSGc:\t\t-6\t\t-6
B:\t\t239\t\t237
M:\t\t1\t\t1
T:\t\t0\t\t0
R:\t\t0\t\t16
S:\t\t0.0190\t\t0.0482
L:\t\t100648\t\t42192
D:\t\t1\t\t1
I:\t\t240\t\t127
N:\t\t240\t\t254
Q:\t\t8\t\t0
V:\t\t0\t\t0
delay:\t\t0\t\t0
INP:\t\t44.00\t\t42.00
RxQueue:\t\t97\t\t0
TxQueue:\t\t32\t\t0
G.INP Framing:\t\t18\t\t0
G.INP lookback:\t\t32\t\t0
RRC bits:\t\t24\t\t0
\t\t\tBearer 1
MSGc:\t\t26\t\t26
B:\t\t0\t\t0
Q:\t\t4\t\t4
delay:\t\t9\t\t9
INP:\t\t2.00\t\t2.00

\t\t\tCounters
\t\t\tBearer 0
OHF:\t\t2093460\t\t1078318
OHFErr:\t\t4\t\t0
RS:\t\t0\t\t1146588
RSCorr:\t\t0\t\t0
RSUnCorr:\t0\t\t0

\t\t\tRetransmit Counters
rtx_tx:\t\t1500\t\t0
rtx_c:\t\t20\t\t0
rtx_uc:\t\t3\t\t0

\t\t\tG.INP Counters
LEFTRS:\t\t0\t\t0
minEFTR:\t99384\t\t39736
errFreeBits:\t412345\t\t0

\t\t\tBearer 0
HEC:\t\t0\t\t0
OCD:\t\t0\t\t0
LCD:\t\t0\t\t0
Total Cells:\t\t1043224419\t\t0
Data Cells:\t\t11012\t\t0
Bit Errors:\t\t0\t\t0

Total time = 5 days 1 hours 2 min 3 sec
FEC:\t\t9876\t\t543
CRC:\t\t60\t\t70
ES:\t\t10\t\t20
SES:\t\t1\t\t1
UAS:\t\t90\t\t90
LOS:\t\t0\t\t0
LOF:\t\t0\t\t0
LOM:\t\t0\t\t0
Latest 15 minutes time = 7 min 4 sec
FEC:\t\t12\t\t4
CRC:\t\t0\t\t0
ES:\t\t0\t\t0
SES:\t\t0\t\t0
UAS:\t\t0\t\t0
Since Link time = 1 days 2 hours 3 min 4 sec
FEC:\t\t123\t\t45
CRC:\t\t6\t\t7
ES:\t\t1\t\t2
SES:\t\t0\t\t0
UAS:\t\t0\t\t0
LOS:\t\t0\t\t0
LOF:\t\t0\t\t0
LOM:\t\t0\t\t0
";

pub(crate) const VENDOR: &str = "xdslctl: ADSL driver and PHY status
ChipSet Vendor Id:\tBDCM:0xc21d
ChipSet VersionNumber:\t0xc21d
ChipSet SerialNumber:\t
";

pub(crate) const VERSION: &str = "xdslctl version 1.0
ADSL PHY: AnnexB version - A2pvbH042u.d26r
";

pub(crate) const PB_PARAMS: &str = "xdslctl: ADSL driver and PHY status
Phone line pair: Inner pair
Discovery Phase (Initial) Band Plan
US: (32,95) (870,1205) (1972,2690)
DS: (96,869) (1206,1971) (2691,4095)
Medley Phase (Final) Band Plan
US: (32,869) (1206,1959)
DS: (870,1205) (1960,4095)
";

pub(crate) const BITS: &str = "xdslctl: ADSL driver and PHY status
Discovery Phase (Initial) Band Plan
US: (32,95) (870,1205) (1972,2690)
 Tone number      Bit Allocation
   0\t\t0
   1\t\t0
   40\t\t7
   41\t\t8
   900\t\t12
   901\t\t11
   4095\t\t0
";

pub(crate) const SNR: &str = "xdslctl: ADSL driver and PHY status
 Tone number      SNR
   0\t\t0.0000
   40\t\t38.5000
   41\t\t38.2500
   900\t\t45.2500
   901\t\t45.5000
";

pub(crate) const QLN: &str = "xdslctl: ADSL driver and PHY status
 Tone number      QLN
   0\t\t-160.0000
   40\t\t-130.0000
   41\t\t-160.0000
   900\t\t-141.0000
   901\t\t-140.5000
";

pub(crate) const HLOG: &str = "xdslctl: ADSL driver and PHY status
 Tone number      Hlog
   0\t\t-96.3000
   40\t\t-10.2500
   900\t\t-20.5000
   901\t\t-21.0000
";
